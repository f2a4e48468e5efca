use std::convert::Infallible;

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct Version;

pub fn build_info() -> String {
    format!(
        "{} {} ({}, {} build, {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("REPO_VERSION"),
        env!("BUILD_PROFILE"),
        env!("BUILD_TIMESTAMP"),
    )
}

#[async_trait::async_trait]
impl crate::op::Op for Version {
    type Error = Infallible;
    type Output = String;

    async fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        Ok(build_info())
    }
}
