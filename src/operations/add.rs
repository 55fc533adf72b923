use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::blob::Blob;
use crate::errors::Result;
use std::path::Path;

impl Repository {
    /// Stage workspace paths for the next commit.
    ///
    /// Directories expand to the files beneath them. Each file's content
    /// is stored as a blob and its path upserted into the index, which is
    /// then rewritten in full.
    pub fn add(&mut self, paths: &[&Path]) -> Result<()> {
        self.index_mut().load()?;

        let paths = paths
            .iter()
            .map(|path| self.workspace().list_files(Some(*path)))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten();

        for path in paths {
            let data = self.workspace().read_file(&path)?;
            let stat = self.workspace().stat_file(&path)?;

            let blob = Blob::new(data);
            let blob_id = self.database().store(&blob)?;

            self.index_mut().add(IndexEntry::new(path, blob_id, stat));
        }

        self.index_mut().write_updates()?;
        Ok(())
    }
}
