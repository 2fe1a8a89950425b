//! Declarative macro for handing API calls to the runtime as effects

/// Create an `Effect::Future` that runs a store or API call and maps both
/// outcomes to actions
///
/// # Example
///
/// ```rust,ignore
/// use tasklist_core::api_call;
///
/// api_call! {
///     call: api.delete(id),
///     on_success: |_ack| Some(ListAction::Deleted { id }),
///     on_error: |error| Some(ListAction::DeleteFailed { id, error })
/// }
/// ```
#[macro_export]
macro_rules! api_call {
    (
        call: $call:expr,
        on_success: |$success_param:pat_param| $success_body:expr,
        on_error: |$error_param:pat_param| $error_body:expr
    ) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move {
            match $call.await {
                ::std::result::Result::Ok($success_param) => $success_body,
                ::std::result::Result::Err($error_param) => $error_body,
            }
        }))
    };
}
