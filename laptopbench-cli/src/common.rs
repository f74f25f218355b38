use async_trait::async_trait;
use erased_serde::Serializer;

/// Every (sub)command knows how to run itself and write its result through
/// an erased serializer.
#[async_trait]
pub trait Run {
    async fn run(&self, serializer: &mut (dyn Serializer + Send)) -> anyhow::Result<()>;
}

/// Implements [`Run`] for a command enum by dispatching on its variants.

#[macro_export]
macro_rules! run_impl_enum {
    ($i:ident, $self:ident, $ser:ident, $b:block) => {
        #[async_trait::async_trait]
        impl $crate::common::Run for $i {
            async fn run(&$self, $ser: &mut (dyn erased_serde::Serializer + Send)) -> anyhow::Result<()> {
                $b;

                Ok(())
            }
        }
    }
}

/// Implements [`Run`] for a command struct by delegating to one field
/// (usually its subcommand).
#[macro_export]
macro_rules! run_impl_struct {
    ($i:ident, $b:ident) => {
        #[async_trait::async_trait]
        impl $crate::common::Run for $i {
            async fn run(
                &self,
                serializer: &mut (dyn erased_serde::Serializer + Send),
            ) -> anyhow::Result<()> {
                self.$b.run(serializer).await
            }
        }
    };
}
