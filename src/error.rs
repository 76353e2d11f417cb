use std::fmt;
use std::path::PathBuf;

/// 外层接口（配置、窗口、图片导出）可能出现的错误。
/// 模拟核心本身没有错误路径，所有输入都会被钳制到合法范围。
#[derive(Debug)]
pub enum AppError {
    /// 读取或解析配置文件失败
    Config {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 配置内容能解析，但取值不合理
    InvalidConfig(String),
    Window(minifb::Error),
    Image(image::ImageError),
}

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AppError::InvalidConfig(msg.into())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config { path, source } => {
                write!(f, "failed to load config '{}': {}", path.display(), source)
            }
            AppError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            AppError::Window(err) => write!(f, "window error: {err}"),
            AppError::Image(err) => write!(f, "image export failed: {err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config { source, .. } => Some(source.as_ref()),
            AppError::InvalidConfig(_) => None,
            AppError::Window(err) => Some(err),
            AppError::Image(err) => Some(err),
        }
    }
}

impl From<minifb::Error> for AppError {
    fn from(err: minifb::Error) -> Self {
        AppError::Window(err)
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Image(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = AppError::invalid("wheelbase must be positive");
        assert_eq!(err.to_string(), "invalid config: wheelbase must be positive");

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = AppError::Config {
            path: PathBuf::from("scene.json"),
            source: Box::new(io),
        };
        assert!(err.to_string().contains("scene.json"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
