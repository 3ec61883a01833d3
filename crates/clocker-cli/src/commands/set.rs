//! Set command for changing one field of an entry.

use anyhow::Result;
use clap::Args;
use clocker_core::{DateContext, Field, ValidationError};
use clocker_db::{Database, Target};

use super::util::resolve_key;

const USAGE: &str = "clocker set [stamp] <field> <value...>";

#[derive(Debug, Clone, Args)]
pub struct SetArgs {
    /// `[stamp] <field> <value...>`; without a stamp the latest entry is used.
    #[arg(required = true, num_args = 2.., allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Splits the positional arguments into target, field and value.
fn parse(args: &[String], dates: &DateContext) -> Result<(Target, Field, String)> {
    match args {
        [field, value] => Ok((Target::Latest, field.parse()?, value.clone())),
        [stamp, field, value @ ..] if !value.is_empty() => Ok((
            Target::Key(resolve_key(dates, stamp)?),
            field.parse()?,
            value.join(" "),
        )),
        _ => Err(ValidationError::Usage(USAGE).into()),
    }
}

pub fn run(db: &mut Database, args: &SetArgs, dates: &DateContext) -> Result<()> {
    let (target, field, value) = parse(&args.args, dates)?;
    let key = db.set_field(&target, &field, &value, dates)?;
    tracing::info!(%key, %field, "updated");
    Ok(())
}
