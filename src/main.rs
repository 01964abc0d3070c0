use clap::Parser;
use llmswitch::cli::{
    debug, gpu, handle_completions, handle_config_init, lifecycle, models, settings, Cli,
    Commands, ConfigCommands, DebugCommands,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn print_output(result: CliResult<String>) -> CliResult<()> {
    let output = result?;
    println!("{}", output);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => llmswitch::cli::serve::run_serve(args).await,
        Commands::Watch(args) => llmswitch::cli::watch::run_watch(args).await,
        Commands::Models(args) => print_output(models::handle_models(&args).await),
        Commands::Gpu(args) => print_output(gpu::handle_gpu(&args).await),
        Commands::Endpoint(args) => print_output(settings::handle_endpoint(&args).await),
        Commands::Interval(args) => print_output(settings::handle_interval(&args).await),
        Commands::Debug(cmd) => match cmd {
            DebugCommands::Show(args) => print_output(debug::handle_debug_show(&args)),
            DebugCommands::Clear(args) => print_output(debug::handle_debug_clear(&args)),
            DebugCommands::Export(args) => print_output(debug::handle_debug_export(&args)),
        },
        Commands::Load(args) => print_output(lifecycle::handle_load(&args).await),
        Commands::Unload(args) => print_output(lifecycle::handle_unload(&args).await),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
