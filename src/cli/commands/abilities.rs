use crate::abilities::{rules_for, Role};
use crate::cli::utils::output_json;
use crate::cli::OutputFormat;

pub async fn handle(role: Role, output_format: OutputFormat) -> anyhow::Result<()> {
    let rules = rules_for(role);

    match output_format {
        OutputFormat::Json => output_json(&rules),
        OutputFormat::Text => {
            println!("Ability rules for {}:", role);
            for rule in rules.iter() {
                println!("  {:<8} {}", rule.action, rule.subject);
            }
            Ok(())
        }
    }
}
