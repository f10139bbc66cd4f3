use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("identity must not be blank")]
    BlankIdentity,

    #[error("message text must not be blank")]
    BlankText,
}
