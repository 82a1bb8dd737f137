//! `cablelist template` command - Article link templates

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::{or_dash, Context};
use crate::cli::output::{emit, Table};
use crate::core::store::ArticleLink;
use crate::core::ArticleConnectionId;

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// List templates
    List {
        /// Only templates with this article connection at either end
        #[arg(long)]
        article: Option<ArticleConnectionId>,
    },

    /// Show one template
    Show {
        start: ArticleConnectionId,
        end: ArticleConnectionId,
    },
}

pub fn run(cmd: TemplateCommands, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    match cmd {
        TemplateCommands::List { article } => {
            let templates = match article {
                Some(article) => ctx.db.article_links().involving(article)?,
                None => ctx.db.article_links().list()?,
            };
            let mut table = Table::new(["START", "END", "TYPE", "DIR", "IDENT", "RESISTANCE"]);
            for template in &templates {
                table.push(template_row(template));
            }
            emit(ctx.format, &templates, &table, "template")
        }
        TemplateCommands::Show { start, end } => {
            let template = ctx
                .db
                .article_links()
                .get(start, end)?
                .ok_or_else(|| miette::miette!("no template {}-{}", start, end))?;

            if ctx.format != OutputFormat::Auto {
                let mut table = Table::new(["START", "END", "TYPE", "DIR", "IDENT", "RESISTANCE"]);
                table.push(template_row(&template));
                return emit(ctx.format, &template, &table, "template");
            }

            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("Template").bold(), style(&template).cyan());
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {} ({})",
                style("Type").bold(),
                template.link_type,
                template.link_type.name()
            );
            println!(
                "{}: {} {}",
                style("Direction").bold(),
                template.direction,
                template.direction.picture()
            );
            println!(
                "{}: {}",
                style("Identification").bold(),
                or_dash(template.identification.as_deref())
            );
            println!(
                "{}: {} {}",
                style("Resistance").bold(),
                or_dash(template.resistance),
                template.link_type.value_unit()
            );
            Ok(())
        }
    }
}

fn template_row(template: &ArticleLink) -> Vec<String> {
    vec![
        template.connection_start.to_string(),
        template.connection_end.to_string(),
        template.link_type.to_string(),
        template.direction.picture().to_string(),
        or_dash(template.identification.as_deref()),
        or_dash(template.resistance),
    ]
}
