use futures::FutureExt;

pub const COMPETITION_KEY: &str = "competition.json";
pub const THEME_KEY: &str = "theme";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("accessing record '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("encoding competition snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A set of string records addressed by key. Writing a record replaces it
/// completely.
pub trait RecordStore: Send + Sync {
    fn read<'f, 'own>(
        &'own self,
        key: &'static str,
    ) -> futures::future::BoxFuture<'f, Result<Option<String>, StorageError>>
    where
        'own: 'f;

    fn write<'f, 'own>(
        &'own self,
        key: &'static str,
        value: String,
    ) -> futures::future::BoxFuture<'f, Result<(), StorageError>>
    where
        'own: 'f;

    fn remove<'f, 'own>(
        &'own self,
        key: &'static str,
    ) -> futures::future::BoxFuture<'f, Result<(), StorageError>>
    where
        'own: 'f;
}

/// Stores every record as a file named after its key.
pub struct FileStore {
    folder: std::sync::Arc<std::path::PathBuf>,
}

impl FileStore {
    pub fn new<P>(folder: P) -> Self
    where
        P: Into<std::path::PathBuf>,
    {
        Self {
            folder: std::sync::Arc::new(folder.into()),
        }
    }

    fn path(&self, key: &str) -> std::path::PathBuf {
        self.folder.join(key)
    }
}

fn io_error(key: &str) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_owned(),
        source,
    }
}

impl RecordStore for FileStore {
    fn read<'f, 'own>(
        &'own self,
        key: &'static str,
    ) -> futures::future::BoxFuture<'f, Result<Option<String>, StorageError>>
    where
        'own: 'f,
    {
        async move {
            match tokio::fs::read_to_string(self.path(key)).await {
                Ok(content) => Ok(Some(content)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(io_error(key)(e)),
            }
        }
        .boxed()
    }

    fn write<'f, 'own>(
        &'own self,
        key: &'static str,
        value: String,
    ) -> futures::future::BoxFuture<'f, Result<(), StorageError>>
    where
        'own: 'f,
    {
        async move {
            if !tokio::fs::try_exists(self.folder.as_path())
                .await
                .unwrap_or(false)
            {
                tokio::fs::create_dir_all(self.folder.as_path())
                    .await
                    .map_err(io_error(key))?;
            }

            tokio::fs::write(self.path(key), value)
                .await
                .map_err(io_error(key))
        }
        .boxed()
    }

    fn remove<'f, 'own>(
        &'own self,
        key: &'static str,
    ) -> futures::future::BoxFuture<'f, Result<(), StorageError>>
    where
        'own: 'f,
    {
        async move {
            match tokio::fs::remove_file(self.path(key)).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(io_error(key)(e)),
            }
        }
        .boxed()
    }
}

/// Keeps records in memory, nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: std::sync::Mutex<std::collections::HashMap<&'static str, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, key: &'static str, value: impl Into<String>) -> Self {
        self.lock().insert(key, value.into());
        self
    }

    pub fn record(&self, key: &'static str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, std::collections::HashMap<&'static str, String>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RecordStore for MemoryStore {
    fn read<'f, 'own>(
        &'own self,
        key: &'static str,
    ) -> futures::future::BoxFuture<'f, Result<Option<String>, StorageError>>
    where
        'own: 'f,
    {
        let value = self.record(key);
        async move { Ok(value) }.boxed()
    }

    fn write<'f, 'own>(
        &'own self,
        key: &'static str,
        value: String,
    ) -> futures::future::BoxFuture<'f, Result<(), StorageError>>
    where
        'own: 'f,
    {
        self.lock().insert(key, value);
        async move { Ok(()) }.boxed()
    }

    fn remove<'f, 'own>(
        &'own self,
        key: &'static str,
    ) -> futures::future::BoxFuture<'f, Result<(), StorageError>>
    where
        'own: 'f,
    {
        self.lock().remove(key);
        async move { Ok(()) }.boxed()
    }
}

/// Reads and writes the competition snapshot and the theme preference.
pub struct Persistence {
    store: std::sync::Arc<dyn RecordStore>,
}

impl Persistence {
    pub fn new<S>(store: S) -> Self
    where
        S: RecordStore + 'static,
    {
        Self {
            store: std::sync::Arc::new(store),
        }
    }

    pub fn from_shared(store: std::sync::Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Loads the stored competition. A record that does not parse counts as
    /// no competition at all.
    #[tracing::instrument(skip(self))]
    pub async fn load_competition(&self) -> Result<Option<scoring::Competition>, StorageError> {
        let raw = match self.store.read(COMPETITION_KEY).await? {
            Some(r) => r,
            None => {
                tracing::debug!("No stored competition");
                return Ok(None);
            }
        };

        match serde_json::from_str::<scoring::Competition>(&raw) {
            Ok(competition) => {
                tracing::info!(id = %competition.id, "Loaded stored competition");
                Ok(Some(competition))
            }
            Err(e) => {
                tracing::warn!("Failed to parse stored competition: {:?}", e);
                Ok(None)
            }
        }
    }

    #[tracing::instrument(skip_all, fields(id = %competition.id))]
    pub async fn save_competition(
        &self,
        competition: &scoring::Competition,
    ) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(competition)?;
        self.store.write(COMPETITION_KEY, encoded).await?;

        tracing::debug!("Stored competition");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn discard_competition(&self) -> Result<(), StorageError> {
        self.store.remove(COMPETITION_KEY).await?;

        tracing::info!("Removed stored competition");
        Ok(())
    }

    pub async fn load_theme(&self) -> Result<common::Theme, StorageError> {
        let raw = self.store.read(THEME_KEY).await?;

        Ok(match raw.as_deref().map(common::Theme::parse) {
            Some(Some(theme)) => theme,
            Some(None) => {
                tracing::warn!("Ignoring unknown theme preference {:?}", raw);
                common::Theme::default()
            }
            None => common::Theme::default(),
        })
    }

    pub async fn save_theme(&self, theme: common::Theme) -> Result<(), StorageError> {
        self.store
            .write(THEME_KEY, theme.as_str().to_owned())
            .await
    }
}
