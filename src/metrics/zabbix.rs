use tracing::debug;

use crate::command::ToolCommand;
use crate::config::DiscoveryConfig;
use crate::error::Result;
use crate::metrics::MetricSink;

/// Delivers values with `zabbix_sender -c <agent config> -k <key> -o <value>`.
#[derive(Debug, Clone)]
pub struct ZabbixSender {
    program: String,
    agent_config: String,
}

impl ZabbixSender {
    pub fn new(program: impl Into<String>, agent_config: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            agent_config: agent_config.into(),
        }
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self::new(config.zabbix_sender.clone(), config.zabbix_confd.clone())
    }

    pub fn command(&self, key: &str, value: &str) -> ToolCommand {
        ToolCommand::new(self.program.clone())
            .arg("-c")
            .arg(self.agent_config.clone())
            .arg("-k")
            .arg(key)
            .arg("-o")
            .arg(value)
    }
}

impl MetricSink for ZabbixSender {
    fn send(&mut self, key: &str, value: &str) -> Result<()> {
        let output = self.command(key, value).run()?;
        debug!("zabbix_sender: {}", output.trim());
        Ok(())
    }
}
