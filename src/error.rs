pub type AfterglowResult<T> = Result<T, AfterglowError>;

#[derive(thiserror::Error, Debug)]
pub enum AfterglowError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("rasterizer error: {0}")]
    Raster(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AfterglowError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }
}
