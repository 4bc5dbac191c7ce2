use crate::errors::SysdocResult;
use crate::models::GenerationRequest;

/// Answer generation collaborator.
pub trait IGenerator: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> SysdocResult<String>;

    fn name(&self) -> &str;
}
