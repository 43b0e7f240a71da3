use service::auth::AuthService;
use service::content::ContentRepository;
use service::media::ImageUploader;
use service::runtime::Backends;

/// Shared handler state; every field is a cheap clone over `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub content: ContentRepository,
    pub uploader: ImageUploader,
    pub auth: AuthService,
}

impl From<Backends> for AppState {
    fn from(b: Backends) -> Self {
        Self { content: b.content, uploader: b.uploader, auth: b.auth }
    }
}
