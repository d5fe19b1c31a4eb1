/// 雅虎財經
pub mod yahoo;
