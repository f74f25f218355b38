use crate::{
    common::Run,
    modules::{ivory::Ivory, notebookcheck::Notebookcheck},
    run_impl_enum,
};
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(name = "laptopbench-cli")]
pub enum Command {
    Ivory(Ivory),
    Notebookcheck(Notebookcheck),
}

run_impl_enum!(Command, self, ser, {
    match self {
        Self::Ivory(i) => i.run(ser).await?,
        Self::Notebookcheck(n) => n.run(ser).await?,
    }
});
