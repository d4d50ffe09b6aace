//! Concurrent distribution pipeline
//!
//! ```text
//!                       Scheduler
//!              ┌──────────────────────────┐
//! Frame ──────►│ submit(): spawn_blocking │   compute workers
//!              │  (semaphore-bounded)     │   run in parallel
//!              └────────────┬─────────────┘
//!                           │ FrameProduct
//!                           ▼
//!                   internal result queue
//!                           │
//!                       repeater task
//!              ┌────────────┼─────────────┐
//!              ▼                          ▼
//!        writer queue               stream queue
//!              │                          │
//!         disk sink                  stream sink
//! ```
//!
//! Compute completion order is not tied to submission order: a later
//! frame whose worker finishes first reaches the sinks first. Products
//! carry the frame timestamp so downstream consumers stay
//! order-independent; see the disk sink for how its `latest` links handle
//! stragglers. Queues are unbounded and nothing is cancellable; the
//! pipeline runs until its input ends or the process terminates.

pub mod compute;
pub mod product;
pub mod scheduler;

pub use compute::FrameProcessor;
pub use product::FrameProduct;
pub use scheduler::Scheduler;
