use std::path::Path;

use anyhow::Context;

use crate::Config;

pub(crate) fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration from {}", path.display()))?;

    let config = toml::from_str(&content)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;

    Ok(config)
}
