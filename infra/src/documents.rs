use anyhow::{Context, Result};
use log::*;
use serde::{de::DeserializeOwned, Serialize};

use crate::storage::Storage;

/// Typed JSON documents over a [`Storage`].
#[derive(Debug, Clone)]
pub struct Documents<S> {
    storage: S,
}

impl<S: Storage> Documents<S> {
    pub fn wrap(storage: S) -> Self {
        Documents { storage }
    }

    pub fn save<D: Serialize>(&self, key: &str, document: &D) -> Result<()> {
        let json = serde_json::to_string(document).context("encode document")?;
        self.storage
            .set(key, &json)
            .with_context(|| format!("save document {:?}", key))?;
        debug!("Saved {:?}", key);
        Ok(())
    }

    /// Loads the document under `key`; a body that does not decode as `D` is
    /// an error, an absent slot is `None`.
    pub fn load<D: DeserializeOwned>(&self, key: &str) -> Result<Option<D>> {
        let body = match self
            .storage
            .get(key)
            .with_context(|| format!("load document {:?}", key))?
        {
            Some(body) => body,
            None => return Ok(None),
        };
        let doc = serde_json::from_str(&body).with_context(|| format!("decode {:?}", key))?;
        Ok(Some(doc))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde::Deserialize;

    #[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Default)]
    struct ADocument {
        name: String,
        count: u32,
    }

    #[test]
    fn load_missing_document_should_return_none() {
        env_logger::try_init().unwrap_or_default();
        let docs = Documents::wrap(MemoryStorage::new());

        let loaded = docs.load::<ADocument>("missing").expect("load");
        info!("Loaded document: {:?}", loaded);

        assert_eq!(None, loaded);
    }

    #[test]
    fn save_load() {
        env_logger::try_init().unwrap_or_default();
        let docs = Documents::wrap(MemoryStorage::new());
        let some_doc = ADocument {
            name: "Dave".to_string(),
            count: 3,
        };

        docs.save("other", &ADocument::default()).expect("save");
        docs.save("dave", &some_doc).expect("save");

        let loaded = docs.load("dave").expect("load");
        assert_eq!(Some(some_doc), loaded);
    }

    #[test]
    fn should_update_on_overwrite() {
        let docs = Documents::wrap(MemoryStorage::new());
        docs.save(
            "doc",
            &ADocument {
                name: "Version 1".into(),
                count: 1,
            },
        )
        .expect("save original");
        docs.save(
            "doc",
            &ADocument {
                name: "Version 2".into(),
                count: 2,
            },
        )
        .expect("save modified");

        let loaded = docs.load::<ADocument>("doc").expect("load");
        assert_eq!(Some("Version 2".to_string()), loaded.map(|d| d.name));
    }

    #[test]
    fn should_fail_on_garbage_body() {
        let storage = MemoryStorage::new();
        storage.set("doc", "{not json").expect("set");
        let docs = Documents::wrap(storage);

        let err = docs.load::<ADocument>("doc").expect_err("load should fail");
        assert!(
            err.downcast_ref::<serde_json::Error>().is_some(),
            "Error: {:?}",
            err
        );
    }
}
