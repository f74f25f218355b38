use structopt::StructOpt;

use crate::{common::Run, run_impl_enum, run_impl_struct};

#[derive(StructOpt)]
pub struct Notebookcheck {
    #[structopt(subcommand)]
    query_type: QueryType,
}

run_impl_struct!(Notebookcheck, query_type);

#[derive(StructOpt)]
enum QueryType {
    Device(device::SubCommand),
}

run_impl_enum!(QueryType, self, ser, {
    match self {
        Self::Device(d) => d.run(ser).await?,
    }
});

mod device {
    use laptopbench::modules::notebookcheck::NotebookCheck;
    use laptopbench::schemas::device::PuType;
    use structopt::StructOpt;

    use crate::run_impl_enum;

    #[derive(StructOpt)]
    pub(super) enum SubCommand {
        /// Look up one CPU by its canonical id.
        Cpu { id: String },
        /// Look up one GPU by its canonical id.
        Gpu { id: String },
    }

    run_impl_enum!(SubCommand, self, ser, {
        let (pu_type, id) = match self {
            Self::Cpu { id } => (PuType::Cpu, id),
            Self::Gpu { id } => (PuType::Gpu, id),
        };
        erased_serde::serialize(
            &NotebookCheck::new()?.device_record(pu_type, id).await?,
            ser,
        )?;
    });
}
