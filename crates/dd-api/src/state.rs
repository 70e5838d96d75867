use dd_core::traits::{AuthProvider, PostRepo, ReplyRepo, UserRepo};

/// State shared across all Actix-web workers. Immutable after startup.
pub struct AppState {
    pub users: Box<dyn UserRepo>,
    pub posts: Box<dyn PostRepo>,
    pub replies: Box<dyn ReplyRepo>,
    pub auth: Box<dyn AuthProvider>,
}

impl AppState {
    /// Wires one store plugin behind all three repository ports.
    pub fn new<S, A>(store: S, auth: A) -> Self
    where
        S: UserRepo + PostRepo + ReplyRepo + Clone + 'static,
        A: AuthProvider + 'static,
    {
        Self {
            users: Box::new(store.clone()),
            posts: Box::new(store.clone()),
            replies: Box::new(store),
            auth: Box::new(auth),
        }
    }
}
