use anyhow::{
    Context,
    Result,
    anyhow,
};
use chrono::Utc;
use serde::{
    Deserialize,
    Serialize,
};
use sha2::{
    Digest,
    Sha256,
};
use std::{
    fmt,
    fs,
    io::Write,
    path::{
        Path,
        PathBuf,
    },
};

pub const DEPLOYMENTS_ROOT: &str = ".deployments";
const DEPLOYMENTS_FILE: &str = "deployments.json";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeploymentEnv {
    Dev,
    Test,
    Local,
}

impl DeploymentEnv {
    pub fn dir_name(self) -> &'static str {
        match self {
            DeploymentEnv::Dev => "dev",
            DeploymentEnv::Test => "test",
            DeploymentEnv::Local => "local",
        }
    }
}

impl fmt::Display for DeploymentEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeploymentEnv::Dev => "Devnet",
            DeploymentEnv::Test => "Testnet",
            DeploymentEnv::Local => "Local",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub deployed_at: String,
    pub contract_address: String,
    pub network_url: String,
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub deployment_block: Option<u64>,
    /// sha256 of the ABI JSON the contract was deployed with
    #[serde(default)]
    pub abi_hash: Option<String>,
}

impl DeploymentRecord {
    pub fn new(contract_address: impl Into<String>, network_url: impl Into<String>) -> Self {
        Self {
            deployed_at: Utc::now().to_rfc3339(),
            contract_address: contract_address.into(),
            network_url: network_url.into(),
            chain_id: None,
            deployment_block: None,
            abi_hash: None,
        }
    }

    /// Records without a hash are treated as compatible with any descriptor.
    pub fn is_compatible_with_abi(&self, hash: &str) -> bool {
        self.abi_hash.as_deref().is_none_or(|stored| stored == hash)
    }
}

#[derive(Debug)]
pub struct DeploymentStore {
    path: PathBuf,
}

impl DeploymentStore {
    pub fn new(env: DeploymentEnv) -> Result<Self> {
        Self::in_root(DEPLOYMENTS_ROOT, env)
    }

    pub fn in_root(root: impl AsRef<Path>, env: DeploymentEnv) -> Result<Self> {
        let path = ensure_store(root.as_ref(), env)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<DeploymentRecord>> {
        read_record(&self.path)
    }

    pub fn save(&self, record: &DeploymentRecord) -> Result<()> {
        write_record(&self.path, record)
    }
}

pub fn compute_abi_hash(abi_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(abi_json.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn ensure_structure() -> Result<()> {
    for env in [
        DeploymentEnv::Dev,
        DeploymentEnv::Test,
        DeploymentEnv::Local,
    ] {
        let _ = ensure_store(Path::new(DEPLOYMENTS_ROOT), env)?;
    }
    Ok(())
}

fn ensure_store(root: &Path, env: DeploymentEnv) -> Result<PathBuf> {
    if !root.exists() {
        fs::create_dir_all(root).with_context(|| {
            format!("Failed to create deployments directory {}", root.display())
        })?;
    }

    let env_dir = root.join(env.dir_name());
    if !env_dir.exists() {
        fs::create_dir_all(&env_dir).with_context(|| {
            format!("Failed to create {} directory", env_dir.display())
        })?;
    }

    let file_path = env_dir.join(DEPLOYMENTS_FILE);
    if !file_path.exists() {
        let mut file = fs::File::create(&file_path).with_context(|| {
            format!(
                "Failed to create deployment record file for {} at {:?}",
                env, file_path
            )
        })?;
        file.write_all(b"").with_context(|| {
            format!("Failed to initialize deployment record file for {}", env)
        })?;
    }

    Ok(file_path)
}

fn read_record(path: impl AsRef<Path>) -> Result<Option<DeploymentRecord>> {
    let data = fs::read(path.as_ref()).context("Failed to read deployment records")?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    if let Ok(record) = serde_json::from_slice::<DeploymentRecord>(&data) {
        return Ok(Some(record));
    }
    if let Ok(mut records) = serde_json::from_slice::<Vec<DeploymentRecord>>(&data) {
        return Ok(records.pop());
    }
    Err(anyhow!(
        "Failed to parse deployment record JSON; expected a single deployment object"
    ))
}

fn write_record(path: impl AsRef<Path>, record: &DeploymentRecord) -> Result<()> {
    let json = serde_json::to_vec_pretty(record)
        .context("Failed to serialize deployment record")?;
    fs::write(path.as_ref(), json).context("Failed to write deployment record")?;
    Ok(())
}

pub fn record_deployment(
    env: DeploymentEnv,
    contract_address: impl AsRef<str>,
    network_url: impl AsRef<str>,
    deployment_block: Option<u64>,
    abi_json: Option<&str>,
) -> Result<DeploymentRecord> {
    let store = DeploymentStore::new(env)?;
    let record = DeploymentRecord {
        deployment_block,
        abi_hash: abi_json.map(compute_abi_hash),
        ..DeploymentRecord::new(contract_address.as_ref(), network_url.as_ref())
    };
    store.save(&record)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn load__fresh_store__returns_none() {
        // given
        let root = TempDir::new("deployments").unwrap();
        let store = DeploymentStore::in_root(root.path(), DeploymentEnv::Local).unwrap();

        // when
        let record = store.load().unwrap();

        // then
        assert!(record.is_none());
        assert!(store.path().ends_with("local/deployments.json"));
    }

    #[test]
    fn save__then_load__returns_saved_record() {
        // given
        let root = TempDir::new("deployments").unwrap();
        let store = DeploymentStore::in_root(root.path(), DeploymentEnv::Test).unwrap();
        let record = DeploymentRecord {
            deployment_block: Some(1_200),
            ..DeploymentRecord::new("0x0000000000000000000000000000000000000001", "http://x")
        };

        // when
        store.save(&record).unwrap();

        // then
        assert_eq!(store.load().unwrap(), Some(record));
    }

    #[test]
    fn load__list_of_records__returns_last_entry() {
        // given
        let root = TempDir::new("deployments").unwrap();
        let store = DeploymentStore::in_root(root.path(), DeploymentEnv::Dev).unwrap();
        let first = DeploymentRecord::new("0xaa", "http://one");
        let second = DeploymentRecord::new("0xbb", "http://two");
        let json = serde_json::to_vec(&vec![first, second.clone()]).unwrap();
        fs::write(store.path(), json).unwrap();

        // when
        let loaded = store.load().unwrap();

        // then
        assert_eq!(loaded, Some(second));
    }

    #[test]
    fn is_compatible_with_abi__compares_stored_hash() {
        let hash = compute_abi_hash("[]");
        let unhashed = DeploymentRecord::new("0xaa", "http://one");
        let hashed = DeploymentRecord {
            abi_hash: Some(hash.clone()),
            ..unhashed.clone()
        };

        assert!(unhashed.is_compatible_with_abi("anything"));
        assert!(hashed.is_compatible_with_abi(&hash));
        assert!(!hashed.is_compatible_with_abi(&compute_abi_hash("[{}]")));
    }
}
