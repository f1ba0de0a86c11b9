use crate::provision::Provisioner;
use crate::runner::{CommandRunner, Invocation};

impl<R: CommandRunner> Provisioner<R> {
    pub(crate) fn firewall_invocations(&self) -> Vec<Invocation> {
        let mut rules = vec![
            Invocation::new("ufw").args(["default", "deny", "incoming"]),
            Invocation::new("ufw").args(["default", "allow", "outgoing"]),
        ];
        for rule in &self.settings.firewall_rules {
            rules.push(Invocation::new("ufw").arg("allow").arg(rule));
        }
        rules.push(Invocation::new("ufw").args(["--force", "enable"]));
        rules
    }

    pub(crate) async fn harden(&self) -> Result<(), anyhow::Error> {
        self.secure_mariadb().await?;
        for rule in self.firewall_invocations() {
            self.runner.run_checked(&rule).await?;
        }
        Ok(())
    }
}
