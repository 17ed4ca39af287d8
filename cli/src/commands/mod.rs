pub mod types;
use anyhow::{anyhow, Result};
use log::{debug, info};
use std::time::Duration;
use types::*;
use void_mint_lib::config::{init_config, MintConfig};
use void_mint_lib::view::{render, MintLinks};
use void_mint_lib::workflow::{MintWorkflow, WorkflowState, WorkflowView};

pub async fn handler(opt: Opts) -> Result<()> {
    match opt.subcmd {
        SubCommand::Init(args) => init_handler(args),
        // check for an already authorized account, never prompts
        SubCommand::Status(args) => status_handler(args).await,
        SubCommand::Connect(args) => connect_handler(args).await,
        // connect if needed, mint, wait for the receipt and the mint event
        SubCommand::Mint(args) => mint_handler(args).await,
        SubCommand::Watch(args) => watch_handler(args).await,
    }
}

pub fn init_handler(args: InitArgs) -> Result<()> {
    debug!("init_handler args: {:?}", &args);
    init_config(
        args.force,
        args.config_path,
        args.default_network,
        args.provider_url,
        args.chain_id,
    )
}

fn open_workflow(
    config_path: &str,
    network: &Option<String>,
) -> Result<(MintWorkflow, WorkflowView)> {
    let config = MintConfig::new(config_path)
        .map_err(|e| anyhow!("failed to load config {}: {}", config_path, e))?;
    MintWorkflow::from_config(&config, network)
}

fn print_state(state: &WorkflowState, links: &MintLinks) {
    for line in render(state, links) {
        println!("{}", line);
    }
}

fn print_alerts(view: &mut WorkflowView) {
    while let Some(alert) = view.try_next_alert() {
        println!("! {}", alert);
    }
}

pub async fn status_handler(args: StatusArgs) -> Result<()> {
    debug!("status_handler args: {:?}", &args);
    let (workflow, mut view) = open_workflow(&args.config_path, &args.network)?;
    workflow.load().await;
    print_alerts(&mut view);
    print_state(&view.snapshot(), workflow.links());
    println!("{}", workflow.links().collection_line());
    workflow.shutdown().await;
    Ok(())
}

pub async fn connect_handler(args: ConnectArgs) -> Result<()> {
    debug!("connect_handler args: {:?}", &args);
    let (workflow, mut view) = open_workflow(&args.config_path, &args.network)?;
    if workflow.load().await.is_none() {
        let res = workflow.connect_wallet().await;
        print_alerts(&mut view);
        res.map_err(|e| anyhow!("failed to connect wallet: {}", e))?;
    }
    print_state(&view.snapshot(), workflow.links());
    workflow.shutdown().await;
    Ok(())
}

pub async fn mint_handler(args: MintArgs) -> Result<()> {
    debug!("mint_handler args: {:?}", &args);
    let (workflow, mut view) = open_workflow(&args.config_path, &args.network)?;
    if workflow.load().await.is_none() {
        let res = workflow.connect_wallet().await;
        print_alerts(&mut view);
        res.map_err(|e| anyhow!("failed to connect wallet: {}", e))?;
    }

    let pending = workflow
        .mint()
        .await
        .map_err(|e| anyhow!("failed to mint: {}", e))?;
    print_state(&view.snapshot(), workflow.links());

    let confirmed = pending.wait().await;
    print_state(&view.snapshot(), workflow.links());
    confirmed.map_err(|e| anyhow!("mint was not confirmed: {}", e))?;

    if view.snapshot().mint_message.is_none() {
        info!("waiting up to {}s for the mint event", args.event_wait);
        let wait_event = async {
            while let Some(state) = view.changed().await {
                if let Some(message) = state.mint_message {
                    return Some(message);
                }
            }
            None
        };
        match tokio::time::timeout(Duration::from_secs(args.event_wait), wait_event).await {
            Ok(Some(message)) => println!("{}", message),
            Ok(None) => println!("event listener closed before the mint event arrived"),
            Err(_) => println!(
                "mint event not seen yet, check {}",
                workflow.links().collection_url
            ),
        }
    }
    workflow.shutdown().await;
    Ok(())
}

pub async fn watch_handler(args: WatchArgs) -> Result<()> {
    debug!("watch_handler args: {:?}", &args);
    let (workflow, mut view) = open_workflow(&args.config_path, &args.network)?;
    workflow.load().await;
    print_state(&view.snapshot(), workflow.links());

    let mut ticker =
        tokio::time::interval(Duration::from_secs(args.account_poll_interval.max(1)));
    loop {
        tokio::select! {
            changed = view.changed() => match changed {
                Some(state) => print_state(&state, workflow.links()),
                None => break,
            },
            _ = ticker.tick() => {
                workflow.refresh_accounts().await;
                print_alerts(&mut view);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("stopping");
                break;
            }
        }
    }
    workflow.shutdown().await;
    Ok(())
}
