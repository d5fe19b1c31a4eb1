/// 計算一年期平均中間價
pub mod average_price;
