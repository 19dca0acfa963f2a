use std::path::{Path, PathBuf};

pub const AUTOMATION_DIR: &str = "automation";
pub const GITHUB_CONFIG_FILE: &str = "github_config.json";
pub const LAST_UPDATE_FILE: &str = "last_conversation_update.json";
pub const SETTINGS_FILE: &str = "dashrun.yaml";
pub const TEMPLATES_DIR: &str = "templates";

pub const CONVERSATION_LOG_FILE: &str = "conversation_log.md";
pub const FILE_MAP_FILE: &str = "file_map.json";
pub const GITIGNORE_FILE: &str = ".gitignore";
pub const GIT_DIR: &str = ".git";

pub fn automation_dir(root: &Path) -> PathBuf {
    root.join(AUTOMATION_DIR)
}

pub fn github_config_path(root: &Path) -> PathBuf {
    automation_dir(root).join(GITHUB_CONFIG_FILE)
}

pub fn last_update_path(root: &Path) -> PathBuf {
    automation_dir(root).join(LAST_UPDATE_FILE)
}

pub fn settings_path(root: &Path) -> PathBuf {
    automation_dir(root).join(SETTINGS_FILE)
}

/// Directory of `.tera` files overriding the embedded templates.
pub fn user_templates_dir(root: &Path) -> PathBuf {
    automation_dir(root).join(TEMPLATES_DIR)
}

pub fn conversation_log_path(root: &Path) -> PathBuf {
    root.join(CONVERSATION_LOG_FILE)
}

pub fn file_map_path(root: &Path) -> PathBuf {
    root.join(FILE_MAP_FILE)
}

pub fn gitignore_path(root: &Path) -> PathBuf {
    root.join(GITIGNORE_FILE)
}

pub fn git_dir(root: &Path) -> PathBuf {
    root.join(GIT_DIR)
}

/// PowerShell's persisted console history under `home`.
pub fn powershell_history_path(home: &Path) -> PathBuf {
    home.join("AppData")
        .join("Roaming")
        .join("Microsoft")
        .join("Windows")
        .join("PowerShell")
        .join("PSReadLine")
        .join("ConsoleHost_history.txt")
}
