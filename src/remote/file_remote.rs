use crate::{
    config::SyncConfig,
    domain::{Board, BoardId, CardId, ListId},
    error::{BoardSyncError, Result},
    remote::{apply_card_order, apply_list_order, RemoteBoard},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};

/// JSON-file-backed remote: one pretty-printed file per board
pub struct FileRemote {
    root_path: PathBuf,
    // Reorder calls in a batch arrive concurrently; each is a
    // read-modify-write of a whole board file.
    write_lock: Mutex<()>,
}

impl FileRemote {
    const BOARDS_DIR: &'static str = "boards";

    /// Creates a new FileRemote rooted at `data_dir`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            root_path: data_dir.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a FileRemote rooted at the configured data directory
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(&config.data_dir)
    }

    fn boards_dir(&self) -> PathBuf {
        self.root_path.join(Self::BOARDS_DIR)
    }

    fn board_file(&self, id: &BoardId) -> PathBuf {
        self.boards_dir().join(format!("{}.json", id.as_str()))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    /// Creates the directory structure
    pub async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.boards_dir()).await
    }

    pub async fn is_initialized(&self) -> bool {
        self.boards_dir().exists()
    }

    /// Writes a whole board, replacing any stored copy
    pub async fn save_board(&self, board: &Board) -> Result<()> {
        self.ensure_directory_exists(&self.boards_dir()).await?;

        let json = serde_json::to_string_pretty(board)?;
        fs::write(self.board_file(&board.id), json).await?;
        Ok(())
    }

    async fn load_board(&self, id: &BoardId) -> Result<Board> {
        let file_path = self.board_file(id);

        if !file_path.exists() {
            return Err(BoardSyncError::BoardNotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&file_path).await?;
        let board: Board = serde_json::from_str(&contents)?;
        Ok(board)
    }

    /// Lists the ids of every stored board
    pub async fn list_board_ids(&self) -> Result<Vec<BoardId>> {
        let boards_dir = self.boards_dir();

        if !boards_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&boards_dir).await?;
        let mut ids = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(BoardId::from(stem));
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Loads each board in turn and applies `update` until one reports that
    /// it held the entity, then saves that board
    async fn update_owning_board<F>(&self, mut update: F) -> Result<bool>
    where
        F: FnMut(&mut Board) -> Result<bool> + Send,
    {
        let _guard = self.write_lock.lock().await;

        for id in self.list_board_ids().await? {
            let mut board = self.load_board(&id).await?;
            if update(&mut board)? {
                self.save_board(&board).await?;
                return Ok(true);
            }
        }

        Ok(false)
    }
}

#[async_trait]
impl RemoteBoard for FileRemote {
    async fn reorder_list(&self, id: &ListId, order: u32) -> Result<()> {
        let found = self
            .update_owning_board(|board| Ok(apply_list_order(board, id, order)))
            .await?;

        if !found {
            return Err(BoardSyncError::ListNotFound(id.to_string()));
        }
        tracing::debug!(list = %id, order, "list order stored");
        Ok(())
    }

    async fn reorder_or_reparent_card(
        &self,
        id: &CardId,
        order: u32,
        list_id: Option<&ListId>,
    ) -> Result<()> {
        let found = self
            .update_owning_board(|board| apply_card_order(board, id, order, list_id))
            .await?;

        if !found {
            return Err(BoardSyncError::CardNotFound(id.to_string()));
        }
        tracing::debug!(card = %id, order, list = ?list_id, "card order stored");
        Ok(())
    }

    async fn fetch_board(&self, id: &BoardId) -> Result<Board> {
        Ok(self.load_board(id).await?.sorted())
    }
}
