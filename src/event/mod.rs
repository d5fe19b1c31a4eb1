/// 計算各股一年期平均中間價並寫入結果檔
pub mod average_price;
