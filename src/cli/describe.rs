//! flow describe command implementation.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;
use crate::generate::DescriptionClient;
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct DescribeOptions {
    pub title: String,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct DescribeOutput {
    title: String,
    description: String,
}

pub async fn run(options: DescribeOptions) -> Result<()> {
    let config = Config::load(options.config.as_deref())?;
    let client = DescriptionClient::new(config.generator_endpoint()?);
    let description = client.generate(&options.title).await?;

    let mut human = HumanOutput::new("Description generated");
    human.push_summary("Title", options.title.clone());
    human.push_detail(description.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "describe",
        &DescribeOutput {
            title: options.title,
            description,
        },
        Some(&human),
    )
}
