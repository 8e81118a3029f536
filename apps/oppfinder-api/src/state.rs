use std::sync::Arc;

use oppfinder_service::OppfinderService;
use oppfinder_storage::{db::Db, index::IndexClient};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<OppfinderService>,
}
impl AppState {
	pub async fn new(config: oppfinder_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let index = IndexClient::new(&config.storage.index)?;
		let service = OppfinderService::new(config, db, index)?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: OppfinderService) -> Self {
		Self { service: Arc::new(service) }
	}
}
