//! Subcommand handlers
//!
//! Each handler drives one screen session the way the mobile screens do:
//! activate, act, print. Session failures are already reported through the
//! notifier, so handlers only print results.

use crate::render;
use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use loadopt_client::{ClientConfig, HttpBackend};
use loadopt_core::prelude::*;
use loadopt_core::{bridge_channel, checkout_url, BridgeOutcome, Notice, NoticeKind};
use loadopt_model::{Customer, EntityId, PaymentStatus};
use std::io::{BufRead, Write};
use std::sync::Arc;

/// Prints notices to stderr
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        let marker = match notice.kind {
            NoticeKind::Error => "error",
            NoticeKind::Warning => "warning",
            NoticeKind::Info | NoticeKind::Success => "note",
        };
        eprintln!("{marker}: {}", notice.title);
        for line in notice.body.lines() {
            eprintln!("  {line}");
        }
    }
}

pub(crate) struct App {
    config: ClientConfig,
    backend: Arc<HttpBackend>,
    notifier: Arc<dyn Notifier>,
}

impl App {
    pub(crate) fn new(config: ClientConfig) -> Result<Self> {
        let backend = HttpBackend::new(&config).context("failed to create backend client")?;
        tracing::debug!(base_url = backend.base_url(), "backend configured");
        Ok(Self {
            config,
            backend: Arc::new(backend),
            notifier: Arc::new(StderrNotifier),
        })
    }

    pub(crate) async fn run(&self, matches: &ArgMatches) -> Result<()> {
        match matches.subcommand() {
            Some(("dashboard", _)) => self.dashboard().await,
            Some(("fleet", _)) => self.fleet().await,
            Some(("items", _)) => self.items().await,
            Some(("add-item", args)) => self.add_item(args).await,
            Some(("remove-item", args)) => self.remove_item(args).await,
            Some(("customers", _)) => self.customers().await,
            Some(("status", args)) => self.status(args).await,
            Some(("optimize", args)) => self.optimize(args.get_flag("json")).await,
            Some(("pay-url", args)) => self.pay_url(id_arg(args)?).await,
            Some(("checkout", args)) => self.checkout(id_arg(args)?).await,
            Some((other, _)) => bail!("unknown command: {other}"),
            None => bail!("no command given"),
        }
    }

    async fn dashboard(&self) -> Result<()> {
        let session = DashboardSession::new(self.backend.clone(), self.notifier.clone());
        if let Err(err) = session.activate().await {
            if err.is_network() {
                eprintln!("Cannot reach server at {}", self.backend.base_url());
            }
            return Err(err.into());
        }
        if let Some(summary) = session.summary() {
            print!("{}", render::dashboard(&summary));
        }
        Ok(())
    }

    async fn fleet(&self) -> Result<()> {
        let session = FleetSession::new(self.backend.clone(), self.notifier.clone());
        session.activate().await?;
        print!("{}", render::fleet(&session.trucks(), &session.carriers()));
        Ok(())
    }

    async fn items(&self) -> Result<()> {
        let session = self.cargo();
        session.activate().await?;
        print!("{}", render::items(&session.items(), &session.customers()));
        Ok(())
    }

    async fn add_item(&self, args: &ArgMatches) -> Result<()> {
        let text = |name: &str| args.get_one::<String>(name).cloned().unwrap_or_default();
        let draft = CargoDraft {
            name: text("name"),
            length: text("length"),
            width: text("width"),
            height: text("height"),
            weight: text("weight"),
            packaging_weight: text("packaging-weight"),
            qty: text("qty"),
            customer_id: args.get_one::<EntityId>("customer").copied(),
        };

        let session = self.cargo();
        if let Applied::Committed(item) = session.add_item(&draft).await? {
            println!("Added #{} {} (x{})", item.id, item.name, item.qty);
        }
        Ok(())
    }

    async fn remove_item(&self, args: &ArgMatches) -> Result<()> {
        let id = id_arg(args)?;
        let confirmation = if args.get_flag("yes") {
            Confirmation::Confirmed
        } else {
            confirm("Remove Item: Are you sure?")?
        };

        let session = self.cargo();
        match session.remove_item(id, confirmation).await? {
            Applied::Committed(true) => println!("Removed #{id}"),
            Applied::Committed(false) if confirmation == Confirmation::Cancelled => {
                println!("Cancelled");
            }
            Applied::Committed(false) => println!("No item #{id}"),
            Applied::Discarded => {}
        }
        Ok(())
    }

    async fn customers(&self) -> Result<()> {
        let session = self.customer_session();
        session.activate().await?;
        print!("{}", render::customers(&session.customers()));
        Ok(())
    }

    async fn status(&self, args: &ArgMatches) -> Result<()> {
        let id = id_arg(args)?;
        let target = args
            .get_one::<String>("status")
            .map_or("cycle", String::as_str);

        let session = self.customer_session();
        session.activate().await?;
        let applied = match target {
            "cycle" => session.cycle_status(id).await?.map(Some),
            name => {
                let status: PaymentStatus = name.parse()?;
                session.select_status(id, StatusChoice::from(status)).await?
            }
        };
        if let Applied::Committed(Some(status)) = applied {
            println!("#{id} is now {status}");
        }
        Ok(())
    }

    async fn optimize(&self, json: bool) -> Result<()> {
        let session = OptimizeSession::new(
            self.backend.clone(),
            self.backend.clone(),
            self.notifier.clone(),
        );
        session.activate().await?;
        if let Applied::Committed(plan) = session.run().await? {
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print!("{}", render::plan(&plan));
            }
        }
        Ok(())
    }

    async fn pay_url(&self, id: EntityId) -> Result<()> {
        let customer = payable(&self.customer_session(), id).await?;
        println!("{}", checkout_url(self.backend.base_url(), customer.id));
        Ok(())
    }

    /// Relay checkout page messages from stdin, one JSON object per line
    async fn checkout(&self, id: EntityId) -> Result<()> {
        let customers = self.customer_session();
        let customer = payable(&customers, id).await?;

        let (tx, bridge) = bridge_channel(self.backend.base_url(), customer, self.notifier.clone());
        let mut bridge = bridge.with_reconciliation(self.config.reconciliation, &customers);
        println!("Open {} and pipe its messages here", bridge.checkout_url());

        // detached: a blocked stdin read must not hold up exit
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => tx.post(line),
                    Err(_) => break,
                }
            }
        });
        bridge.on_load_end();

        let outcome = bridge.next_outcome().await;
        match outcome {
            Some(BridgeOutcome::Paid(confirmation)) => {
                let _ = confirmation.acknowledge();
                Ok(())
            }
            Some(BridgeOutcome::Cancelled) | None => bail!("payment not completed"),
        }
    }

    fn cargo(&self) -> CargoSession {
        CargoSession::new(self.backend.clone(), self.notifier.clone())
    }

    fn customer_session(&self) -> CustomersSession {
        CustomersSession::new(self.backend.clone(), self.notifier.clone())
    }
}

/// Customer with an open invoice
async fn payable(session: &CustomersSession, id: EntityId) -> Result<Customer> {
    session.activate().await?;
    let Some(customer) = session.customer(id) else {
        bail!("no customer with id {id}");
    };
    if !customer.can_pay() {
        bail!("{} has no open invoice", customer.name);
    }
    Ok(customer)
}

fn id_arg(args: &ArgMatches) -> Result<EntityId> {
    args.get_one::<EntityId>("id")
        .copied()
        .context("missing id argument")
}

fn confirm(prompt: &str) -> Result<Confirmation> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{prompt} [y/N] ")?;
    stdout.flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(parse_confirmation(&answer))
}

fn parse_confirmation(answer: &str) -> Confirmation {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Confirmation::Confirmed,
        _ => Confirmation::Cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert_eq!(parse_confirmation("y\n"), Confirmation::Confirmed);
        assert_eq!(parse_confirmation(" YES "), Confirmation::Confirmed);
        assert_eq!(parse_confirmation("\n"), Confirmation::Cancelled);
        assert_eq!(parse_confirmation("remove"), Confirmation::Cancelled);
    }
}
