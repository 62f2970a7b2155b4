// call.rs — Invoke a tool through the governance pipeline.

use anyhow::Context;
use fg_gateway::{Gateway, GatewayConfig};
use fg_tools::ToolCallRequest;
use serde_json::Value;

pub fn execute(config: &GatewayConfig, user: &str, tool: &str, args: &str) -> anyhow::Result<()> {
    let parsed: Value = serde_json::from_str(args).context("--args must be valid JSON")?;
    let arguments = parsed
        .as_object()
        .cloned()
        .context("--args must be a JSON object")?;

    let gateway = Gateway::new(config).context("failed to start gateway")?;
    let request = ToolCallRequest::new(user, tool, arguments);
    let request_id = request.request_id;

    let result = gateway.handle(&request);

    if result.success {
        let payload = result.payload.unwrap_or(Value::Null);
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        // The pipeline deliberately reports one generic message for
        // every failure cause; point the operator at the audit trail.
        println!("{}", result.error.as_deref().unwrap_or("tool call failed"));
        println!();
        println!(
            "For details run: finguard audit tail  (request {})",
            request_id
        );
    }
    Ok(())
}

pub fn list_tools(config: &GatewayConfig) -> anyhow::Result<()> {
    let gateway = Gateway::new(config).context("failed to start gateway")?;
    for name in gateway.tool_names() {
        println!("{}", name);
    }
    Ok(())
}
