//! 登录验证命令

use anyhow::{Context, Result};
use colored::Colorize;
use vinv_vsphere::{Endpoint, VsphereClient};

use super::common::{finish, CommandContext};

pub async fn handle(ctx: &CommandContext) -> Result<()> {
    let settings = &ctx.config.vsphere;
    let endpoint = Endpoint::parse(&settings.url).context("解析 vCenter 地址失败")?;
    println!("{} 连接 {}", "→".cyan(), endpoint.to_string().yellow());

    let client = VsphereClient::new(endpoint, settings.client_config())
        .context("创建 vSphere 客户端失败")?;
    let session = client
        .login(&settings.username, &settings.password)
        .await
        .context("vSphere 登录失败")?;

    let result = show_about(&client, &session.user_name).await;
    finish(&client, result).await
}

async fn show_about(client: &VsphereClient, user_name: &str) -> Result<()> {
    let about = client.about().await.context("获取产品信息失败")?;

    println!("{} 登录成功: {}", "✓".green().bold(), user_name.cyan().bold());
    println!("  产品:     {}", about.full_name.yellow());
    println!("  类型:     {}", about.api_type);
    println!("  版本:     {} (build {})", about.version, about.build);
    println!("  API 版本: {}", about.api_version);
    if let Some(uuid) = &about.instance_uuid {
        println!("  实例 UUID: {}", uuid);
    }

    Ok(())
}
