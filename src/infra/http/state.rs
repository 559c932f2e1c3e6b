use std::sync::Arc;

use crate::application::characters::CharacterService;
use crate::application::gateway::CharacterGateway;

use super::auth::AuthVerifier;

#[derive(Clone)]
pub struct ApiState {
    pub characters: Arc<CharacterService>,
    pub gateway: Arc<CharacterGateway>,
    pub auth: Arc<AuthVerifier>,
}
