//! # Tasklist Core
//!
//! Core traits and domain types for the tasklist to-do service.
//!
//! This crate provides the abstractions shared by the server and the client
//! view model:
//!
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits (`Clock`)
//! - **Task model**: [`todo::Task`], list queries and partial patches
//! - **Todo store**: the [`todo_store::TodoStore`] persistence boundary
//! - **Todo API**: the [`todo_api::TodoApi`] client boundary used by the UI
//!
//! ## Example
//!
//! ```ignore
//! use tasklist_core::*;
//!
//! #[derive(Clone, Debug)]
//! struct ListState {
//!     todos: Vec<Task>,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum ListAction {
//!     Load,
//!     Loaded { todos: Vec<Task> },
//! }
//!
//! impl Reducer for ListReducer {
//!     type State = ListState;
//!     type Action = ListAction;
//!     type Environment = ListEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut ListState,
//!         action: ListAction,
//!         env: &ListEnvironment,
//!     ) -> SmallVec<[Effect<ListAction>; 4]> {
//!         // View logic goes here
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Declarative macros for building effects
pub mod effect_macros;

/// Task data model, list queries and deadline parsing
pub mod todo;

/// Persistence boundary for tasks
pub mod todo_store;

/// Client boundary to the todo HTTP API
pub mod todo_api;

/// Reducer module - The core trait for view and domain logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all decision logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for ListReducer {
    ///     type State = ListState;
    ///     type Action = ListAction;
    ///     type Environment = ListEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut ListState,
    ///         action: ListAction,
    ///         env: &ListEnvironment,
    ///     ) -> SmallVec<[Effect<ListAction>; 4]> {
    ///         match action {
    ///             ListAction::FilterChanged { filter } => {
    ///                 state.filter = filter;
    ///                 smallvec![Self::load(state, env)]
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// The effects to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Async computation, usually an API call
        ///
        /// The action it resolves to, if any, is fed back into the reducer.
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Whether this effect does nothing
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, SystemClock};

    #[test]
    fn test_effect_debug_hides_future() {
        let effect: Effect<()> = Effect::Future(Box::pin(async { None }));
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");
    }

    #[test]
    fn test_only_none_is_none() {
        let future: Effect<()> = Effect::Future(Box::pin(async { Some(()) }));
        assert!(!future.is_none());
        assert!(Effect::<()>::None.is_none());
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
