use std::path::{Path, PathBuf};

pub struct Env {}

impl Env {
    pub const SYS_NAME: &'static str = "pyxis-plot";

    /// Environment variable that overrides the default experiments directory.
    pub const EXPERIMENTS_DIR_ENV: &'static str = "PYXIS_EXPERIMENTS_DIR";

    pub fn proj_root() -> PathBuf {
        env!("CARGO_MANIFEST_DIR").into()
    }

    /// Directory holding one sub-directory per experiment run. Defaults to
    /// `<proj_root>/experiments`, unless `PYXIS_EXPERIMENTS_DIR` is set.
    pub fn experiments_root() -> PathBuf {
        if let Ok(dir) = std::env::var(Self::EXPERIMENTS_DIR_ENV) {
            return Self::expand_path(&dir);
        }

        let mut path = Self::proj_root();
        path.push("experiments");
        path
    }

    pub fn run_root(experiments_root: &Path, run: u32) -> PathBuf {
        experiments_root.join(format!("{run}"))
    }

    /// Expand a leading `~` in a user-provided path.
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).into_owned())
    }

    pub fn get_version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
