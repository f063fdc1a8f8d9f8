//! `annotations`: print the internal and public annotation sets.

use super::common::{OutputFormat, Session, StackArgs, with_newline};
use crate::annotations::{AnnotationInputs, AnnotationSet, Tier, applicable_rules, compose};
use crate::references::UpstreamRefs;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AnnotationsCommand {
    /// Only print one tier
    #[arg(long, value_enum)]
    pub tier: Option<Tier>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl AnnotationsCommand {
    pub async fn execute(self, manifest_path: Option<PathBuf>, args: &StackArgs) -> Result<()> {
        let session = Session::open(manifest_path, args).await?;
        let store = session.references();
        let refs = UpstreamRefs::resolve(store.as_ref(), &session.stack_reference())
            .await?;
        let inputs = AnnotationInputs::resolved(&session.ctx.stack, &refs, &session.project);

        let tiers: Vec<Tier> = self.tier.map_or_else(|| Tier::ALL.to_vec(), |t| vec![t]);
        let sets: BTreeMap<String, AnnotationSet> = tiers
            .iter()
            .map(|tier| (tier.to_string(), compose(*tier, &inputs)))
            .collect();

        match self.format {
            OutputFormat::Text => {
                for tier in tiers {
                    let rules = applicable_rules(tier, &inputs).join(", ");
                    println!(
                        "{} {}",
                        format!("{tier}:").bold(),
                        format!("({rules})").dimmed()
                    );
                    for (key, value) in sets[tier.as_str()].iter() {
                        println!("  {key}: {value}");
                    }
                }
            }
            format => print!("{}", with_newline(format.render(&sets)?)),
        }
        Ok(())
    }
}
