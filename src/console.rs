//! Interactive console: a numbered menu over the account operations.

use anyhow::{Context, Result, bail};
use log::debug;
use serde::Serialize;
use std::io::{BufRead, Write};
use uuid::Uuid;

use crate::account::{Account, AccountAttributes, Accounts, ListRequest};

const BANNER: &str = "\
Accounts API Console
---------------------
Select one of the following options and press enter:
1. Create a new account
2. Fetch an existing account
3. List accounts
4. Delete an account
Enter to exit";

/// Reads menu choices from `input` and writes prompts and results to `output`.
///
/// Operation failures are printed as `Error: <message>` and the loop goes on.
/// An empty line or end of input ends the session.
pub struct Console<A, R, W> {
    accounts: A,
    input: R,
    output: W,
}

impl<A: Accounts, R: BufRead, W: Write> Console<A, R, W> {
    pub fn new(accounts: A, input: R, output: W) -> Self {
        Self {
            accounts,
            input,
            output,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        writeln!(self.output, "{}", BANNER)?;

        loop {
            let choice = self.prompt("-> ")?;
            let outcome = match choice.as_str() {
                "" => break,
                "1" => self.create().await,
                "2" => self.fetch().await,
                "3" => self.list().await,
                "4" => self.delete().await,
                other => {
                    writeln!(self.output, "Unknown option: {}", other)?;
                    continue;
                }
            };

            if let Err(e) = outcome {
                debug!("Console operation failed: {:?}", e);
                writeln!(self.output, "Error: {:#}", e)?;
            }
        }

        writeln!(self.output, "Bye!")?;
        Ok(())
    }

    async fn create(&mut self) -> Result<()> {
        writeln!(self.output, "Create")?;

        let organisation_id = match self.prompt("Organisation ID (empty for a new one): ")? {
            id if id.is_empty() => Uuid::new_v4(),
            id => parse_id(&id)?,
        };

        let attributes = AccountAttributes {
            country: optional(self.prompt("Country: ")?),
            base_currency: optional(self.prompt("Base currency: ")?),
            bank_id: optional(self.prompt("Bank ID: ")?),
            bank_id_code: optional(self.prompt("Bank ID code: ")?),
            bic: optional(self.prompt("BIC: ")?),
            account_number: optional(self.prompt("Account number: ")?),
            customer_id: optional(self.prompt("Customer ID: ")?),
            name: split_list(&self.prompt("Name (comma separated lines): ")?),
            alternative_names: split_list(&self.prompt("Alternative names: ")?),
            iban: optional(self.prompt("IBAN: ")?),
            account_classification: optional(self.prompt("Account classification: ")?),
            joint_account: parse_flag(&self.prompt("Joint account: ")?)?,
            switched: parse_flag(&self.prompt("Switched: ")?)?,
            account_matching_opt_out: parse_flag(&self.prompt("Account matching opt-out: ")?)?,
            secondary_identification: optional(self.prompt("Secondary identification: ")?),
            ..Default::default()
        };

        let account = Account::new(organisation_id, attributes);
        let created = self.accounts.create(&account).await?;
        self.print_json(&created)
    }

    async fn fetch(&mut self) -> Result<()> {
        writeln!(self.output, "Fetch")?;
        let id = parse_id(&self.prompt("Account ID: ")?)?;
        let account = self.accounts.fetch(id).await?;
        self.print_json(&account)
    }

    async fn list(&mut self) -> Result<()> {
        writeln!(self.output, "List")?;
        let request = ListRequest {
            page_number: parse_number(&self.prompt("Page number: ")?, "page number")?,
            page_size: parse_number(&self.prompt("Page size: ")?, "page size")?,
            ..Default::default()
        };
        let accounts = self.accounts.list(&request).await?;
        self.print_json(&accounts)
    }

    async fn delete(&mut self) -> Result<()> {
        writeln!(self.output, "Delete")?;
        let id = parse_id(&self.prompt("Account ID: ")?)?;
        let version = parse_number(&self.prompt("Version: ")?, "version")?;
        self.accounts.delete(id, version).await?;
        writeln!(self.output, "Account deleted successfully")?;
        Ok(())
    }

    /// Writes `label` and reads one trimmed line. End of input reads as empty.
    fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .context("Failed to read from input")?;
        Ok(line.trim().to_string())
    }

    fn print_json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        write_json(&mut self.output, value)
    }
}

/// Writes `value` as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(output: &mut W, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    writeln!(output, "{}", json)?;
    Ok(())
}

fn optional(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Splits a comma separated answer, dropping blank items.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).with_context(|| format!("Invalid account ID {:?}", value))
}

/// Parses a yes/no answer. An empty answer leaves the flag unset.
fn parse_flag(value: &str) -> Result<Option<bool>> {
    match value.to_lowercase().as_str() {
        "" => Ok(None),
        "y" | "yes" | "true" | "1" => Ok(Some(true)),
        "n" | "no" | "false" | "0" => Ok(Some(false)),
        other => bail!("Invalid yes/no answer {:?}", other),
    }
}

/// Parses a number. An empty answer is zero.
fn parse_number<T>(value: &str, what: &str) -> Result<T>
where
    T: std::str::FromStr + Default,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if value.is_empty() {
        return Ok(T::default());
    }
    value
        .parse()
        .with_context(|| format!("Invalid {} {:?}", what, value))
}
