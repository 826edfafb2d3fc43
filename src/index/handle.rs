use tracing::{debug, info};

use super::{IndexResult, IndexSchema, SearchBackend};
use crate::document::ListingDocument;

/// One named index for the duration of a run. Opening it resets the index;
/// closing it flushes pending writes.
pub struct IndexHandle<B: SearchBackend> {
    backend: B,
    name: String,
    schema: IndexSchema,
    written: usize,
}

impl<B: SearchBackend> IndexHandle<B> {
    pub async fn open(backend: B, name: &str, schema: IndexSchema) -> IndexResult<Self> {
        let handle = IndexHandle {
            backend,
            name: name.to_string(),
            schema,
            written: 0,
        };
        handle.reset().await?;
        Ok(handle)
    }

    /// Drop the index if present, then create it empty with the handle's schema.
    pub async fn reset(&self) -> IndexResult<()> {
        if self.backend.index_exists(&self.name).await? {
            info!("Deleting existing index {}", self.name);
            self.backend.delete_index(&self.name).await?;
        }
        self.backend.create_index(&self.name, &self.schema).await?;
        info!("Created index {}", self.name);
        Ok(())
    }

    /// Index one document. Same-url documents are stored again, not merged.
    pub async fn write(&mut self, doc: &ListingDocument) -> IndexResult<()> {
        self.backend.index_document(&self.name, doc).await?;
        self.written += 1;
        debug!("Indexed {}", doc.url);
        Ok(())
    }

    pub async fn flush(&self) -> IndexResult<()> {
        self.backend.refresh(&self.name).await
    }

    pub async fn close(self) -> IndexResult<usize> {
        self.flush().await?;
        info!("Closed index {} ({} documents written)", self.name, self.written);
        Ok(self.written)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn written(&self) -> usize {
        self.written
    }
}
