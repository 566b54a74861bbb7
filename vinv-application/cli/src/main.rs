//! vinv CLI 应用

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, Level};

mod commands;
mod config;

use commands::common::CommandContext;
use config::{OutputFormat, VinvConfig};

#[derive(Parser)]
#[command(name = "vinv")]
#[command(about = "vinv - vCenter 清单只读查询工具", long_about = None)]
#[command(version)]
struct Cli {
    /// 日志级别
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// 配置文件路径
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// vCenter 地址 (覆盖 GOVMOMI_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// 忽略证书校验错误 (覆盖 GOVMOMI_INSECURE)
    #[arg(long, global = true, num_args = 0..=1, default_missing_value = "true")]
    insecure: Option<bool>,

    /// 输出格式
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// 数据中心名称 (默认查询整个清单)
    #[arg(short, long, global = true)]
    datacenter: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 登录 vCenter 并显示产品信息
    Login,

    /// 数据中心查询
    Datacenter {
        #[command(subcommand)]
        action: DatacenterAction,
    },

    /// 集群查询
    Cluster {
        #[command(subcommand)]
        action: ClusterAction,
    },

    /// 主机查询
    Host {
        #[command(subcommand)]
        action: HostAction,
    },

    /// 数据存储查询
    Datastore {
        #[command(subcommand)]
        action: DatastoreAction,
    },

    /// 网络查询
    Network {
        #[command(subcommand)]
        action: NetworkAction,
    },

    /// 虚拟机查询
    Vm {
        #[command(subcommand)]
        action: VmAction,
    },

    /// 标签查询
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// 分布式交换机查询
    Switch {
        #[command(subcommand)]
        action: SwitchAction,
    },

    /// 第一类磁盘 (FCD) 查询
    Fcd {
        #[command(subcommand)]
        action: FcdAction,
    },

    /// 主机、数据存储与网络概览
    Summary,

    /// 按类型获取任意属性
    Props {
        /// 对象类型，如 host、vm、HostSystem
        kind: String,
        /// 属性路径，如 summary.hardware.numCpuCores
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[derive(Subcommand)]
enum DatacenterAction {
    /// 显示默认数据中心
    Default,
    /// 列出所有数据中心
    List,
}

#[derive(Subcommand)]
enum ClusterAction {
    /// 列出集群
    List,
    /// 显示默认集群
    Default,
}

#[derive(Subcommand)]
enum HostAction {
    /// 列出主机 CPU 与内存使用情况
    List,
    /// 列出主机 PCI 设备数量
    Pci,
}

#[derive(Subcommand)]
enum DatastoreAction {
    /// 列出数据存储容量
    List,
}

#[derive(Subcommand)]
enum NetworkAction {
    /// 列出网络
    List,
}

#[derive(Subcommand)]
enum VmAction {
    /// 列出虚拟机配置与运行状态
    List {
        /// 仅显示已开机的虚拟机
        #[arg(long)]
        powered_on: bool,
    },
    /// 显示虚拟机所在 ESXi 主机
    Placement {
        /// 按名称过滤 (可多次指定)
        #[arg(long = "name", short = 'n')]
        names: Vec<String>,
    },
}

#[derive(Subcommand)]
enum TagAction {
    /// 列出标签及挂载对象
    List,
    /// 列出每台虚拟机上的标签
    Vms,
}

#[derive(Subcommand)]
enum SwitchAction {
    /// 列出分布式交换机
    List,
    /// 列出分布式端口组 VLAN
    Portgroups,
}

#[derive(Subcommand)]
enum FcdAction {
    /// 列出第一类磁盘
    List {
        /// 仅查询指定数据存储
        #[arg(long)]
        datastore: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    debug!("vinv CLI 启动");

    // 命令行参数优先于配置文件与环境变量
    let mut config = VinvConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        config.vsphere.url = url;
    }
    if let Some(insecure) = cli.insecure {
        config.vsphere.insecure = insecure;
    }
    if let Some(datacenter) = cli.datacenter {
        config.vsphere.datacenter = Some(datacenter);
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    config.validate()?;

    let ctx = CommandContext::new(config);

    // 处理命令
    match cli.command {
        Commands::Login => commands::login::handle(&ctx).await?,
        Commands::Datacenter { action } => commands::datacenter::handle(action, &ctx).await?,
        Commands::Cluster { action } => commands::cluster::handle(action, &ctx).await?,
        Commands::Host { action } => commands::host::handle(action, &ctx).await?,
        Commands::Datastore { action } => commands::datastore::handle(action, &ctx).await?,
        Commands::Network { action } => commands::network::handle(action, &ctx).await?,
        Commands::Vm { action } => commands::vm::handle(action, &ctx).await?,
        Commands::Tag { action } => commands::tag::handle(action, &ctx).await?,
        Commands::Switch { action } => commands::switch::handle(action, &ctx).await?,
        Commands::Fcd { action } => commands::fcd::handle(action, &ctx).await?,
        Commands::Summary => commands::summary::handle(&ctx).await?,
        Commands::Props { kind, paths } => commands::props::handle(&kind, &paths, &ctx).await?,
    }

    Ok(())
}
