mod accounts;
mod comments;
mod donations;
mod posts;
