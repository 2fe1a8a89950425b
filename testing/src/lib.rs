//! # Tasklist Testing
//!
//! Testing utilities for the tasklist workspace.
//!
//! This crate provides:
//! - [`FixedClock`]: deterministic time
//! - [`ReducerTest`]: Given-When-Then harness for reducers
//! - [`InMemoryTodoStore`]: `HashMap`-backed [`TodoStore`](tasklist_core::todo_store::TodoStore)
//! - [`MockTodoApi`]: scriptable [`TodoApi`](tasklist_core::todo_api::TodoApi)
//!
//! ## Example
//!
//! ```ignore
//! use tasklist_testing::{MockTodoApi, test_clock};
//! use tasklist_runtime::Store;
//!
//! #[tokio::test]
//! async fn loads_on_mount() {
//!     let api = Arc::new(MockTodoApi::new());
//!     api.seed("Buy milk", None).await;
//!
//!     let store = Store::new(ListState::default(), ListReducer, ListEnvironment::new(api, Arc::new(test_clock())));
//!     store.send(ListAction::Mounted).await.unwrap();
//! }
//! ```

use chrono::{DateTime, Utc};
use tasklist_core::environment::Clock;

/// Scriptable API client
pub mod api_mocks;


/// In-memory todo store
pub mod store_mocks;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use tasklist_testing::mocks::FixedClock;
    /// use tasklist_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::seconds(1_735_689_600))
    }
}

pub use api_mocks::{ApiCall, ApiOperation, MockTodoApi};
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
pub use store_mocks::InMemoryTodoStore;
