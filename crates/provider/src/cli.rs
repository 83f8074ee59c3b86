use crate::{config::TagConfig, ProviderConfig};
use anyhow::Context as _;
use schema::{MemoryData, ResourceData};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Inspect and exercise the Circonus provider outside of an orchestrator.
#[derive(Debug, clap::Parser)]
#[clap(author, about, version)]
pub struct Cli {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Debug, clap::Subcommand)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Print the attribute schema of a resource or data source, or of
    /// every one of them.
    Schema(SchemaArgs),
    /// Validate a resource configuration and print the entity it would
    /// send to the platform. No platform calls are made.
    Encode(EncodeArgs),
    /// Adopt an existing platform entity, and print its state.
    Import(ImportArgs),
    /// Read a data source, and print its state.
    Read(ReadArgs),
}

#[derive(Debug, clap::Args)]
pub struct SchemaArgs {
    /// Name of the resource or data source, such as `circonus_check` or `check`.
    name: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct EncodeArgs {
    /// Name of the resource.
    resource: String,
    /// JSON configuration of the resource, or `-` for stdin.
    config: PathBuf,
    #[clap(flatten)]
    tagging: TagConfig,
}

#[derive(Debug, clap::Args)]
pub struct ImportArgs {
    /// Name of the resource.
    resource: String,
    /// Platform identifier of the entity, which may be percent-encoded.
    id: String,
    #[clap(flatten)]
    provider: ProviderConfig,
}

#[derive(Debug, clap::Args)]
pub struct ReadArgs {
    /// Name of the data source.
    source: String,
    /// JSON configuration of the data source, or `-` for stdin.
    config: PathBuf,
    #[clap(flatten)]
    provider: ProviderConfig,
}

impl Cli {
    pub async fn run(&self) -> anyhow::Result<()> {
        let out = match &self.cmd {
            Command::Schema(args) => args.run()?,
            Command::Encode(args) => args.run()?,
            Command::Import(args) => args.run().await?,
            Command::Read(args) => args.run().await?,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        Ok(())
    }
}

impl SchemaArgs {
    fn run(&self) -> anyhow::Result<Value> {
        let mut schemas = BTreeMap::new();

        for resource in crate::resources() {
            schemas.insert(resource.name(), resource.schema());
        }
        for source in crate::data_sources() {
            schemas.insert(source.name(), source.schema());
        }

        let Some(name) = &self.name else {
            return Ok(serde_json::to_value(schemas)?);
        };
        let found = schemas
            .into_iter()
            .find(|(full, _)| crate::matches_name(full, name))
            .map(|(_, schema)| schema)
            .ok_or_else(|| anyhow::anyhow!("{name} is not a resource or data source"))?;

        Ok(serde_json::to_value(found)?)
    }
}

impl EncodeArgs {
    fn run(&self) -> anyhow::Result<Value> {
        let resource = crate::resource(&self.resource)
            .ok_or_else(|| anyhow::anyhow!("{} is not a resource", self.resource))?;
        let config = read_config(&self.config)?;

        let data = MemoryData::new(Arc::new(resource.schema()), &config);
        let wire = resource.encode(&self.tagging.meta(), &data)?;
        Ok(wire)
    }
}

impl ImportArgs {
    async fn run(&self) -> anyhow::Result<Value> {
        let resource = crate::resource(&self.resource)
            .ok_or_else(|| anyhow::anyhow!("{} is not a resource", self.resource))?;
        let ctx = self.provider.configure();

        let mut data = MemoryData::new(Arc::new(resource.schema()), &Value::Object(Default::default()));
        resource
            .import(&ctx, &self.id, &mut data)
            .await
            .with_context(|| format!("importing {} {:?}", resource.name(), self.id))?;

        Ok(serde_json::json!({
            "id": data.id(),
            "state": data.state(),
        }))
    }
}

impl ReadArgs {
    async fn run(&self) -> anyhow::Result<Value> {
        let source = crate::data_source(&self.source)
            .ok_or_else(|| anyhow::anyhow!("{} is not a data source", self.source))?;
        let config = read_config(&self.config)?;
        let ctx = self.provider.configure();

        let mut data = MemoryData::new(Arc::new(source.schema()), &config);
        source
            .read(&ctx, &mut data)
            .await
            .with_context(|| format!("reading {}", source.name()))?;

        Ok(serde_json::json!({
            "id": data.id(),
            "state": data.state(),
        }))
    }
}

fn read_config(path: &Path) -> anyhow::Result<Value> {
    let mut content = String::new();

    if path.as_os_str() == "-" {
        std::io::stdin()
            .read_to_string(&mut content)
            .context("reading configuration from stdin")?;
    } else {
        content = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration {}", path.display()))?;
    }
    serde_json::from_str(&content).with_context(|| format!("parsing configuration {}", path.display()))
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_schema_lookup() {
        let cli = Cli::parse_from(["circonus-provider", "schema", "rule_set"]);
        let Command::Schema(args) = &cli.cmd else {
            panic!("expected the schema command");
        };
        let schema = args.run().unwrap();
        assert!(schema["attributes"]["if"].is_object());

        let all = SchemaArgs { name: None }.run().unwrap();
        assert!(all["circonus_account"].is_object());
        assert!(all["circonus_worksheet"].is_object());

        SchemaArgs { name: Some("nope".to_string()) }.run().unwrap_err();
    }

    #[test]
    fn test_encode_flags() {
        let cli = Cli::parse_from([
            "circonus-provider",
            "encode",
            "circonus_metric_cluster",
            "cluster.json",
            "--auto-tag",
        ]);
        let Command::Encode(args) = &cli.cmd else {
            panic!("expected the encode command");
        };
        assert!(args.tagging.auto_tag);
        assert_eq!(args.tagging.default_tag, "author:terraform");
    }
}
