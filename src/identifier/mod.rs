pub mod arxiv;

pub use arxiv::{Arxiv, arxiv_location, is_arxiv_url};
