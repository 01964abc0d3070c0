//! Model and GPU monitors.
//!
//! Each monitor implements [`RefreshCycle`](crate::poller::RefreshCycle):
//! one cycle fetches its source, records what happened in the debug sink and
//! publishes a rendered [`ViewState`] on a watch channel. A
//! [`MonitorSession`] owns both monitors and their pollers.

mod gpu;
mod models;
mod sequence;
mod session;
mod view;

pub use gpu::GpuMonitor;
pub use models::ModelMonitor;
pub use sequence::CycleSequence;
pub use session::MonitorSession;
pub use view::ViewState;
