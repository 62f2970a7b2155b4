// whoami.rs — Show how an identity token resolves.

use fg_identity::{IdentityError, IdentityResolver};

pub fn execute(user: &str) -> anyhow::Result<()> {
    match IdentityResolver::default().resolve(user) {
        Ok(identity) => {
            println!("identity:     {}", identity.raw_id);
            println!("role:         {}", identity.role.as_str());
            println!("capabilities:");
            for capability in &identity.capabilities {
                println!("  - {}", capability.as_str());
            }
            Ok(())
        }
        Err(IdentityError::UnknownIdentity { raw_id }) => {
            println!("'{}' does not match any known identity pattern.", raw_id);
            println!("Every request with this token will be rejected.");
            Ok(())
        }
    }
}
