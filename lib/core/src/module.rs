use axum::Router;

/// A service module that contributes HTTP routes.
///
/// Each business module (meeting, bot, ...) implements this trait to
/// register its API endpoints. The binary entry point collects all
/// modules and merges their routes into a single Router, then applies
/// the identity-resolution middleware on top.
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// Return the module's routes, to be merged into the root router.
    fn routes(&self) -> Router;
}
