/// A static asset served by the target, with its known-good md5
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAsset {
    pub path: String,
    pub md5: String,
}

impl StaticAsset {
    pub fn new(path: impl Into<String>, md5: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            md5: md5.into(),
        }
    }
}

/// Assets bundled with the reference memo application
pub const DEFAULT_STATIC_FILES: &[(&str, &str)] = &[
    (
        "/css/bootstrap-responsive.min.css",
        "f889adb0886162aa4ceab5ff6338d888",
    ),
    ("/css/bootstrap.min.css", "4082271c7f87b09c7701ffe554e61edd"),
    ("/js/jquery.min.js", "628072e7212db1e8cdacb22b21752cda"),
    ("/js/bootstrap.min.js", "d700a93337122b390b90bbfe21e64f71"),
];

pub fn default_manifest() -> Vec<StaticAsset> {
    DEFAULT_STATIC_FILES
        .iter()
        .map(|(path, md5)| StaticAsset::new(*path, *md5))
        .collect()
}
