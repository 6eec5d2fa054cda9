//! # funnel-core
//!
//! Coalesce inputs from several independent batch loaders into one call per
//! loader, and get the results back as a single list in the order the inputs
//! were submitted.
//!
//! ## Usage
//! ```
//! use funnel_core::Funnel;
//!
//! #[derive(Debug, PartialEq)]
//! struct User {
//!     name: String,
//! }
//!
//! // One round-trip per backend, however many users each one serves.
//! fn load_by_id(ids: &[u64]) -> Vec<User> {
//!     ids.iter().map(|id| User { name: format!("user-{id}") }).collect()
//! }
//!
//! fn load_by_email(emails: &[&str]) -> Vec<User> {
//!     emails.iter().map(|e| User { name: e.to_string() }).collect()
//! }
//!
//! let funnel = Funnel::new();
//! let by_id = funnel.through(load_by_id);
//! let by_email = funnel.through(load_by_email);
//!
//! by_id.accept(7);
//! by_email.accept("ada@example.com");
//! funnel.add(User { name: "guest".into() });
//! by_id.accept(9);
//!
//! let users = funnel.run()?;
//! let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
//! assert_eq!(names, ["user-7", "ada@example.com", "guest", "user-9"]);
//! # Ok::<(), funnel_core::FunnelError>(())
//! ```
//!
//! ## Absent values
//! There is no null input, converter or post-conversion: each is required by
//! type, so an absent one is rejected by the compiler before the funnel is
//! touched.
//!
//! ```compile_fail
//! use funnel_core::Funnel;
//!
//! let funnel: Funnel<String> = Funnel::new();
//! funnel.add(None);
//! ```
//!
//! ```compile_fail
//! use funnel_core::Funnel;
//!
//! let funnel: Funnel<String> = Funnel::new();
//! let lane = funnel.through(None);
//! ```
//!
//! ```compile_fail
//! use funnel_core::Funnel;
//!
//! let funnel: Funnel<u64> = Funnel::new();
//! let lane = funnel.through(|ids: &[u64]| ids.to_vec());
//! lane.accept_with(1, None);
//! ```
//!
//! ## Lifecycle
//! `run` consumes the funnel, and lane handles borrow it, so nothing can be
//! accepted once `run` has started.
//!
//! ```compile_fail
//! use funnel_core::Funnel;
//!
//! let funnel: Funnel<u64> = Funnel::new();
//! let lane = funnel.through(|ids: &[u64]| ids.to_vec());
//! let out = funnel.run();
//! lane.accept(1);
//! ```
//!
//! A funnel is confined to the thread that built it.
//!
//! ```compile_fail
//! use funnel_core::Funnel;
//!
//! fn assert_send<S: Send>(_: S) {}
//! assert_send(Funnel::<u64>::new());
//! ```

pub mod batch;
pub mod error;
pub mod funnel;
mod indexed;

pub use batch::Batch;
pub use error::{BoxError, FunnelError};
pub use funnel::Funnel;
