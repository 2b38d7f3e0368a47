// src/collect/sources/mod.rs
pub mod newsapi;
pub mod nitter;
pub mod reddit;
pub mod rss;
pub mod stocktwits;
pub mod yahoo;

pub use newsapi::NewsApiAdapter;
pub use nitter::NitterAdapter;
pub use reddit::RedditAdapter;
pub use rss::FeedAdapter;
pub use stocktwits::StocktwitsAdapter;
pub use yahoo::YahooNewsAdapter;
