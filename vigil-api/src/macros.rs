//! Utility macros for reducing boilerplate

/// Macro to implement `FromRef<AppState>` for state extractors.
///
/// Handlers can then take `State<QueryFacade>` (or any other registered
/// field) instead of the whole `AppState`.
///
/// # Example
/// ```ignore
/// impl_from_ref!(QueryFacade, queries);
/// // Expands to:
/// impl axum::extract::FromRef<AppState> for QueryFacade {
///     fn from_ref(state: &AppState) -> Self {
///         state.queries.clone()
///     }
/// }
/// ```
#[macro_export]
macro_rules! impl_from_ref {
    ($type:ty, $field:ident) => {
        impl axum::extract::FromRef<$crate::state::AppState> for $type {
            fn from_ref(state: &$crate::state::AppState) -> Self {
                state.$field.clone()
            }
        }
    };
}
