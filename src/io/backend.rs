// Local filesystem implementation of the directory/file service

use super::directory::{load_file_content, read_directory};
use super::protocol::{
    DirContent, ElementContent, ElementInfoRequest, GoToDirRequest, OpenFileRequest, Request,
    PARENT_DIR,
};
use crate::config::BackendConfig;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serves protocol requests from the local filesystem. Directory ids are
/// absolute paths rendered as strings.
pub struct LocalBackend {
    start_dir: PathBuf,
    show_hidden: bool,
    preview_limit: usize,
}

impl LocalBackend {
    pub fn new(start_dir: PathBuf, config: &BackendConfig) -> Self {
        Self {
            start_dir,
            show_hidden: config.show_hidden,
            preview_limit: config.preview_limit,
        }
    }

    pub fn handle(&self, request: Request) -> Result<Value, String> {
        debug!(?request, "backend request");
        let encoded = match request {
            Request::InitDirectory => serde_json::to_value(self.init_dir()?),
            Request::NavigateToDirectory(req) => serde_json::to_value(self.go_to_dir(&req)?),
            Request::GetElementInfo(req) => serde_json::to_value(self.element_info(&req)?),
            Request::OpenFile(req) => {
                self.open_file(&req)?;
                Ok(Value::Null)
            }
        };
        encoded.map_err(|e| e.to_string())
    }

    fn list(&self, dir: &Path, prev_dir: Option<String>) -> Result<DirContent, String> {
        let elements_list = read_directory(dir, self.show_hidden)
            .map_err(|e| format!("Cannot read {}: {}", dir.display(), e))?;
        Ok(DirContent {
            current_dir: dir.display().to_string(),
            elements_list,
            prev_dir,
        })
    }

    fn init_dir(&self) -> Result<DirContent, String> {
        self.list(&self.start_dir, None)
    }

    fn go_to_dir(&self, req: &GoToDirRequest) -> Result<DirContent, String> {
        let current = PathBuf::from(&req.current_dir);
        if req.dir_name == PARENT_DIR {
            let Some(parent) = current.parent() else {
                // Already at the root: re-list it in place.
                return self.list(&current, None);
            };
            let came_from = current
                .file_name()
                .map(|n| n.to_string_lossy().to_string());
            return self.list(parent, came_from);
        }

        let target = current.join(&req.dir_name);
        if !target.is_dir() {
            return Err(format!("Not a directory: {}", target.display()));
        }
        self.list(&target, None)
    }

    fn element_info(&self, req: &ElementInfoRequest) -> Result<ElementContent, String> {
        let path = Path::new(&req.current_dir).join(&req.element_name);
        if path.is_dir() {
            let elements_list = read_directory(&path, self.show_hidden)
                .map_err(|e| format!("Cannot read directory: {}", e))?;
            Ok(ElementContent::Directory { elements_list })
        } else {
            let data = load_file_content(&path, self.preview_limit)?;
            Ok(ElementContent::File { data })
        }
    }

    fn open_file(&self, req: &OpenFileRequest) -> Result<(), String> {
        let path = Path::new(&req.current_dir).join(&req.file_name);
        open::that(&path).map_err(|e| format!("Failed to open: {}", e))
    }
}
