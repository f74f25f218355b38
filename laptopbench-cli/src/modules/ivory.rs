use structopt::StructOpt;

use crate::{common::Run, run_impl_enum, run_impl_struct};

#[derive(StructOpt)]
pub struct Ivory {
    #[structopt(subcommand)]
    query_type: QueryType,
}

run_impl_struct!(Ivory, query_type);

#[derive(StructOpt)]
enum QueryType {
    Scrape(scrape::SubCommand),
}

run_impl_enum!(QueryType, self, ser, {
    match self {
        Self::Scrape(s) => s.run(ser).await?,
    }
});

mod scrape {
    use laptopbench::common::LaptopSource;
    use laptopbench::modules::{ivory::Ivory, notebookcheck::NotebookCheck};
    use structopt::StructOpt;

    use crate::run_impl_enum;

    #[derive(StructOpt)]
    pub(super) enum SubCommand {
        /// Collect the catalog's laptops, resolve their CPU/GPU benchmarks
        /// and emit the joined records.
        Laptops {
            #[structopt(long, default_value = "4")]
            pages: u32,
        },
    }

    run_impl_enum!(SubCommand, self, ser, {
        match self {
            Self::Laptops { pages } => {
                let laptops = Ivory::new(*pages).collect().await?;
                let resolver = NotebookCheck::new()?;
                erased_serde::serialize(&resolver.with_benchmarks(laptops).await, ser)?;
            }
        }
    });
}
